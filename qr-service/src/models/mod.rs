pub mod roll_number;

pub use roll_number::RollNumber;
