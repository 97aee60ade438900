use std::time::Duration;
use x11rb::protocol::xproto::*;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_screen((width, height): (u16, u16)) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize_aux(&self) -> ConfigureWindowAux {
        ConfigureWindowAux::new()
            .width(self.width as u32)
            .height(self.height as u32)
    }
}

/// Bounded retry: sleep `interval`, probe, repeat up to `attempts` times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Poll {
    pub attempts: usize,
    pub interval: Duration,
}

impl Poll {
    pub const fn new(attempts: usize, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    pub fn run<T, E, S, P>(&self, mut sleep: S, mut probe: P) -> Result<Option<T>, E>
    where
        S: FnMut(Duration),
        P: FnMut() -> Result<Option<T>, E>,
    {
        for _ in 0..self.attempts {
            sleep(self.interval);
            if let Some(found) = probe()? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub fn timeout(&self) -> Duration {
        self.interval * self.attempts as u32
    }
}
