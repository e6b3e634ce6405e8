pub mod definition;
pub mod destination;
pub mod flow;
pub mod question;
pub mod recommendation;
pub mod screening;
pub mod session;
pub mod triage;
pub mod validation;
