mod common;

mod finalize;
mod run;
mod score;
mod submission;
