pub mod clone;
pub mod logs;
pub mod prompt;
pub mod smoke;
pub mod sprint;
pub mod stack;
pub mod validate;
