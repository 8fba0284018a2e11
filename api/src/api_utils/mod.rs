pub mod custom_extract;
