mod mobility;
mod monitor;
mod sim_time;
mod topologies;
