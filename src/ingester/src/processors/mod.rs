pub mod identity;
pub mod test_event_code;
