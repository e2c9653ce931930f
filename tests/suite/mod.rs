mod config;
mod determinism;
mod interrupt;
mod resaturation;
mod scenarios;
