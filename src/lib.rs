pub mod app;
pub mod gym;
pub mod net;
pub mod report;
pub mod runner;
pub mod sim;
pub mod topo;

#[cfg(test)]
mod test;
