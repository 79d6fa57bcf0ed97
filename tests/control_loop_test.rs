use std::cell::RefCell;
use std::rc::Rc;

use sumosense::behavior::{BehaviorState, ControlLoop, Transition};
use sumosense::config::SenseConfig;
use sumosense::sensors::mock::{ManualClock, ScriptedImu};
use sumosense::{MotionEstimator, MotionSnapshot};

type Journal = Rc<RefCell<Vec<String>>>;

struct Seek {
    journal: Journal,
}

struct Push {
    journal: Journal,
    steps: u32,
}

impl BehaviorState for Seek {
    fn enter(&mut self) {
        self.journal.borrow_mut().push("enter seek".to_string());
    }

    fn step(&mut self, motion: &MotionSnapshot) -> Transition {
        if motion.contact {
            Transition::Switch(Box::new(Push {
                journal: Rc::clone(&self.journal),
                steps: 0,
            }))
        } else {
            Transition::Stay
        }
    }

    fn name(&self) -> &'static str {
        "seek"
    }
}

impl BehaviorState for Push {
    fn enter(&mut self) {
        self.journal.borrow_mut().push("enter push".to_string());
    }

    fn step(&mut self, motion: &MotionSnapshot) -> Transition {
        self.steps += 1;
        if motion.contact {
            return Transition::Stay;
        }
        self.journal
            .borrow_mut()
            .push(format!("lost contact after {} steps", self.steps));
        Transition::Switch(Box::new(Seek {
            journal: Rc::clone(&self.journal),
        }))
    }

    fn name(&self) -> &'static str {
        "push"
    }
}

#[test]
fn test_contact_drives_behavior_transitions() {
    let mut config = SenseConfig::default();
    config.gyro.calibration_samples = 4;

    let mut imu = ScriptedImu::new();
    for _ in 0..4 {
        imu.push_gyro_z(10);
    }
    let accel = [
        (40, -30),
        (35, -25),
        (42, -28),
        (6000, 100),
        (6100, 120),
        (6050, 90),
        (60, -20),
        (55, -25),
        (50, -30),
        (45, -20),
    ];
    for (x, y) in accel {
        imu.push_accel(x, y);
    }

    let mut estimator = MotionEstimator::new(imu, ManualClock::new(), &config).unwrap();
    assert_eq!(estimator.calibrate(), 10);

    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut control = ControlLoop::new(Box::new(Seek {
        journal: Rc::clone(&journal),
    }));

    let mut contacts = Vec::new();
    let mut behaviors = Vec::new();
    for _ in 0..accel.len() {
        estimator.clock().advance_ms(10);
        let snapshot = estimator.poll();
        assert!(snapshot.fresh_sample);
        // Gyro reads exactly the bias
        assert_eq!(snapshot.heading_degrees, 0);

        control.step(&snapshot);
        contacts.push(snapshot.contact);
        behaviors.push(control.current_name());
    }

    assert_eq!(
        contacts,
        [false, false, false, false, true, true, true, false, false, false]
    );
    assert_eq!(
        behaviors,
        ["seek", "seek", "seek", "seek", "push", "push", "push", "seek", "seek", "seek"]
    );
    assert_eq!(
        *journal.borrow(),
        [
            "enter seek",
            "enter push",
            "lost contact after 3 steps",
            "enter seek"
        ]
    );
    assert_eq!(control.iterations(), 10);
}

#[test]
fn test_stale_accelerometer_registers_hold_contact_state() {
    let mut config = SenseConfig::default();
    config.gyro.calibration_samples = 1;
    config.collision.threshold = 1000;

    let mut imu = ScriptedImu::new();
    imu.push_gyro_z(0);
    imu.push_accel(3000, 0);

    let mut estimator = MotionEstimator::new(imu, ManualClock::new(), &config).unwrap();
    estimator.calibrate();

    let first = estimator.poll();
    assert!(first.fresh_sample && first.contact);

    // The queue is empty so the registers keep returning (3000, 0)
    for _ in 0..20 {
        estimator.clock().advance_ms(1);
        let snapshot = estimator.poll();
        assert!(!snapshot.fresh_sample);
        assert!(snapshot.contact);
    }
    assert_eq!(estimator.collision().accepted_samples(), 1);
}
