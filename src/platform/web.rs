//! Browser frame scheduling via `requestAnimationFrame`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameScheduler, TickHandle};

type FrameCallback = Box<dyn FnMut(TickHandle, f64)>;

/// Forwards each animation frame to a callback installed after construction
///
/// The callback is usually a closure holding a `Weak` to the controller that
/// owns this scheduler. One JS closure is created up front and handed to every
/// `requestAnimationFrame` call, so cancelled requests leave nothing behind.
pub struct RafScheduler {
    next_id: u64,
    /// Browser request id of the pending frame
    request_id: Option<i32>,
    /// Handle the next animation frame is delivered as
    armed: Rc<Cell<Option<TickHandle>>>,
    on_frame: Rc<RefCell<Option<FrameCallback>>>,
    raf_closure: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new() -> Self {
        let armed: Rc<Cell<Option<TickHandle>>> = Rc::new(Cell::new(None));
        let on_frame: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let raf_closure = {
            let armed = armed.clone();
            let slot = on_frame.clone();
            Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                let Some(handle) = armed.take() else {
                    return;
                };
                // Take the callback out while it runs; it may schedule again
                let callback = slot.borrow_mut().take();
                if let Some(mut callback) = callback {
                    callback(handle, time);
                    let mut slot = slot.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(callback);
                    }
                }
            })
        };

        Self {
            next_id: 0,
            request_id: None,
            armed,
            on_frame,
            raf_closure,
        }
    }

    pub fn set_on_frame(&self, callback: impl FnMut(TickHandle, f64) + 'static) {
        *self.on_frame.borrow_mut() = Some(Box::new(callback));
    }
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for RafScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);

        let Some(window) = web_sys::window() else {
            log::warn!("No window; frame {:?} will never fire", handle);
            return handle;
        };
        if let Some(id) = self.request_id.take() {
            if self.armed.get().is_some() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        match window.request_animation_frame(self.raf_closure.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.request_id = Some(id);
                self.armed.set(Some(handle));
            }
            Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
        }
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.armed.get() != Some(handle) {
            return;
        }
        if let (Some(window), Some(id)) = (web_sys::window(), self.request_id.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.armed.set(None);
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.armed.get() {
            self.cancel(handle);
        }
    }
}
