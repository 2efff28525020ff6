use std::io;
use std::thread::{self, JoinHandle};

/// Starts the long-running loops of the player.
pub trait Spawner {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static;
}

pub struct ThreadSpawner;

impl ThreadSpawner {
    pub fn new() -> Self {
        ThreadSpawner
    }
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner for ThreadSpawner {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        log::debug!("Spawning thread {}", name);
        thread::Builder::new().name(name.to_string()).spawn(f)
    }
}
