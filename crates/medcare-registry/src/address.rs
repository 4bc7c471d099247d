use std::sync::Arc;

use medcare_core::{
  Error, Result,
  event::EventPublisher,
  person::{Address, AddressPatch},
  store::RegistryStore,
};

use crate::shared::Shared;

/// Reads and in-place updates of addresses. Addresses are created and
/// deleted only together with their owning person.
pub struct AddressService<S, P> {
  shared: Arc<Shared<S, P>>,
}

fn not_found(id: i64) -> Error { Error::NotFound(format!("address {id} not found")) }

impl<S: RegistryStore, P: EventPublisher> AddressService<S, P> {
  pub(crate) fn new(shared: Arc<Shared<S, P>>) -> Self { Self { shared } }

  pub async fn find(&self, id: i64) -> Result<Address> {
    self
      .shared
      .call("get address", self.shared.store.get_address(id))
      .await?
      .ok_or_else(|| not_found(id))
  }

  pub async fn list(&self) -> Result<Vec<Address>> {
    self
      .shared
      .call("list addresses", self.shared.store.list_addresses())
      .await
  }

  pub async fn update(&self, id: i64, patch: AddressPatch) -> Result<Address> {
    let mut address = self.find(id).await?;
    patch.apply(&mut address.data);
    address.data.check_required()?;

    self
      .shared
      .commit(self.shared.store.update_address(address))
      .await?
      .ok_or_else(|| not_found(id))
  }
}
