//! Pure computational algorithms for turtle kinematics
//!
//! No I/O here: everything is plain computation that the nodes build on.
//!
//! # Available Algorithms
//!
//! - **angle**: heading normalization and signed shortest turns
//! - **pose_estimator**: open-loop pose estimation from commanded velocity

pub mod angle;
pub mod pose_estimator;
