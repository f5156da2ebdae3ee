mod arbitration;
mod config_file;
mod mode_fan_out;
mod network_lifecycle;
