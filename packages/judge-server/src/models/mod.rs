pub mod contest;
pub mod run;
pub mod score;
pub mod shared;
pub mod submission;
