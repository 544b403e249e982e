//! Composition root.
//!
//! Builds one [`SupabaseClient`] and hands a collection over it to every
//! screen, so no screen reaches for a shared global client.

use std::sync::Arc;

use crate::api::{ConnectivityResult, SupabaseClient};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, RemoteError};
use crate::form::FormController;
use crate::models::{Employee, FuelType, Transaction};
use crate::notify::NotificationSink;
use crate::remote::{Entity, RemoteCollection, RestCollection};
use crate::view_model::ListViewModel;

/// A list and its create/edit dialog, sharing one collection.
pub struct Screen<T: Entity> {
    pub list: ListViewModel<T>,
    pub form: FormController<T>,
}

impl<T: Entity> Screen<T> {
    pub fn new(remote: Arc<dyn RemoteCollection<T>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            list: ListViewModel::new(Arc::clone(&remote), Arc::clone(&sink)),
            form: FormController::new(remote, sink),
        }
    }

    pub async fn submit(&mut self) -> Result<T, DashboardError> {
        self.form.submit(&mut self.list).await
    }

    pub async fn confirm_delete(&mut self) -> Result<bool, RemoteError> {
        self.form.confirm_delete(&mut self.list).await
    }
}

pub struct Dashboard {
    client: SupabaseClient,
    sink: Arc<dyn NotificationSink>,
}

impl Dashboard {
    pub fn new(
        config: &DashboardConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, DashboardError> {
        Ok(Self {
            client: SupabaseClient::new(config)?,
            sink,
        })
    }

    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    pub fn collection<T: Entity>(&self) -> Arc<dyn RemoteCollection<T>> {
        Arc::new(RestCollection::<T>::new(self.client.clone()))
    }

    pub fn screen<T: Entity>(&self) -> Screen<T> {
        Screen::new(self.collection(), Arc::clone(&self.sink))
    }

    pub fn employees(&self) -> Screen<Employee> {
        self.screen()
    }

    pub fn transactions(&self) -> Screen<Transaction> {
        self.screen()
    }

    pub fn fuel_types(&self) -> Screen<FuelType> {
        self.screen()
    }

    pub async fn test_connectivity(&self) -> ConnectivityResult {
        self.client.test_connectivity().await
    }
}
