pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{AuthUser, NewTodo, Todo, TodoFilter, TodoPage, User};
pub use ports::{DatabaseService, PortError, PortResult, WeatherService};
pub use service::TodoService;
