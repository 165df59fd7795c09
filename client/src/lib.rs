mod app;
mod dom;
mod export;
mod identity;
mod net;
mod render;
mod ws;

pub use app::run;
