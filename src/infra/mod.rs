pub mod output;
pub mod table;
pub mod throttle;
pub mod universalis;
