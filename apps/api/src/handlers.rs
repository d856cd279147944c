pub mod approvals;
pub mod context;
pub mod health;
pub mod positions;

#[cfg(test)]
mod tests;
