pub mod contest;
pub mod health;
pub mod run;
pub mod score;
pub mod submission;
