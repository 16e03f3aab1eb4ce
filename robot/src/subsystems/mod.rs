pub mod arm;
pub mod drivetrain;
pub mod hanger;
pub mod indexer;
pub mod intake;
pub mod led;
pub mod shooter;

pub use arm::Arm;
pub use drivetrain::Drivetrain;
pub use hanger::Hanger;
pub use indexer::Indexer;
pub use intake::Intake;
pub use led::Led;
pub use shooter::Shooter;
