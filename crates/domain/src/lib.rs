pub mod block;
pub mod content;
pub mod field;
pub mod layout;
pub mod link;
pub mod model;
pub mod setting;
