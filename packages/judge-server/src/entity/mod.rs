pub mod coding_score;
pub mod contest;
pub mod contest_participant;
pub mod question;
pub mod submission;
pub mod test_case;
pub mod test_case_result;
