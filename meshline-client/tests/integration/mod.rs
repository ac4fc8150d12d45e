pub mod lifecycle_tests;
pub mod mesh_tests;
pub mod rtc_tests;
