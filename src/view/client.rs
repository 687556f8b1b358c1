use super::{ViewCommand, ViewError, ViewEvent, ViewOptions, ViewRequest, ViewSnapshot};
use crate::map::InteractionMode;
use crate::model::{Coordinate, RestaurantRef};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument};

/// Cloneable handle to a running view. Every call answers with the state after the
/// command was applied.
#[derive(Clone)]
pub struct ViewClient {
    sender: mpsc::Sender<ViewRequest>,
    events: broadcast::Sender<ViewEvent>,
}

impl ViewClient {
    pub(crate) fn new(sender: mpsc::Sender<ViewRequest>, events: broadcast::Sender<ViewEvent>) -> Self {
        Self { sender, events }
    }

    /// Switching mode drops any open popup.
    #[instrument(skip(self))]
    pub async fn set_mode(&self, mode: InteractionMode) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::SetMode(mode)).await
    }

    /// Places (or with `None` removes) the picker marker. Invalid coordinates count as `None`.
    #[instrument(skip(self))]
    pub async fn set_picker(&self, picker: Option<Coordinate>) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::SetPicker(picker)).await
    }

    /// Extra restaurants shown while no route is active.
    #[instrument(skip(self, restaurants), fields(count = restaurants.len()))]
    pub async fn set_restaurants(&self, restaurants: Vec<RestaurantRef>) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::SetRestaurants(restaurants)).await
    }

    #[instrument(skip(self))]
    pub async fn set_options(&self, options: ViewOptions) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::SetOptions(options)).await
    }

    pub async fn close_popup(&self) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::ClosePopup).await
    }

    pub async fn snapshot(&self) -> Result<ViewSnapshot, ViewError> {
        self.request(ViewCommand::Snapshot).await
    }

    /// Picks and selections from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    async fn request(&self, command: ViewCommand) -> Result<ViewSnapshot, ViewError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ViewRequest { command, respond_to })
            .await
            .map_err(|_| ViewError::ActorCommunication("view closed".into()))?;
        response
            .await
            .map_err(|_| ViewError::ActorCommunication("view dropped response channel".into()))
    }
}
