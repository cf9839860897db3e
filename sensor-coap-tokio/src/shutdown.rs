// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use tokio::sync::watch;

/// Creates a connected [`ShutdownTrigger`] and [`ShutdownSignal`].
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger(sender), ShutdownSignal(receiver))
}

/// Requests that every associated [`ShutdownSignal`] fires.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    /// Fires the signal. Calling this more than once has no further effect.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

/// Observes a [`ShutdownTrigger`]. Can be cloned freely.
///
/// Dropping the trigger without calling [`ShutdownTrigger::trigger`] means the
/// signal never fires.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// Returns true once the trigger has fired.
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Completes once the trigger has fired.
    pub async fn triggered(&mut self) {
        while !*self.0.borrow_and_update() {
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
