mod bootstrap;
mod loop_runner;
mod map_scene;
mod params;
mod plugins;

pub(crate) use loop_runner::run;
