pub mod collection;
pub mod editor;
pub mod model;
pub mod scheduler;
