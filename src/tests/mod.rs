mod config;
mod wifi;
