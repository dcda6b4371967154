// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, timestamps},
    db::{from_record, to_record, Collection, RecordStore, WriteOp},
    models::customer::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
};

/// CRUD simples de clientes. As vendas só leem daqui por id.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn RecordStore>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let records = self.store.read_all(Collection::Customers).await?;
        let mut customers: Vec<Customer> = records
            .into_iter()
            .filter_map(|record| match from_record::<Customer>(record) {
                Ok(customer) => Some(customer),
                Err(e) => {
                    tracing::warn!("Cliente ilegível ignorado: {}", e);
                    None
                }
            })
            .collect();
        customers.sort_by_cached_key(|c| c.name.to_lowercase());
        Ok(customers)
    }

    pub async fn get_customer(&self, id: &str) -> Result<Customer, AppError> {
        let record = self
            .store
            .read_one(Collection::Customers, id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))?;
        Ok(from_record(record)?)
    }

    pub async fn create_customer(
        &self,
        payload: CreateCustomerPayload,
    ) -> Result<Customer, AppError> {
        let now = timestamps::now_iso();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: payload.name.trim().to_string(),
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            location: payload.location,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        self.store
            .apply(vec![WriteOp::Put {
                collection: Collection::Customers,
                record: to_record(&customer)?,
            }])
            .await?;
        Ok(customer)
    }

    /// Mescla só os campos enviados; `id` e `createdAt` não mudam.
    pub async fn update_customer(
        &self,
        id: &str,
        payload: UpdateCustomerPayload,
    ) -> Result<Customer, AppError> {
        self.get_customer(id).await?;

        let mut patch = to_record(&payload)?;
        patch.insert("updatedAt".into(), timestamps::now_iso().into());

        self.store
            .apply(vec![WriteOp::Merge {
                collection: Collection::Customers,
                id: id.to_string(),
                patch,
            }])
            .await?;
        self.get_customer(id).await
    }

    pub async fn delete_customer(&self, id: &str) -> Result<Customer, AppError> {
        let customer = self.get_customer(id).await?;
        self.store
            .apply(vec![WriteOp::Delete { collection: Collection::Customers, id: id.to_string() }])
            .await?;
        Ok(customer)
    }
}
