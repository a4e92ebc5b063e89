pub mod logging;
pub mod path_resolver;
pub mod savings;
pub mod validation;
