//! Unit test modules.

mod credentials_test;
mod geo_test;
mod progress_test;
mod proximity_test;
mod story_machine_test;
mod story_parser_test;
