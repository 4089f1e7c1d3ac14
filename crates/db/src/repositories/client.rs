//! Client repository for database operations.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryOrder, Set,
};

use invoicer_core::invoice::Client;

use crate::entities::clients;

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found.
    #[error("Client {0} not found")]
    NotFound(i32),

    /// Contact person is required.
    #[error("Contact person is required")]
    MissingContactPerson,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating a client.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    /// Contact person.
    pub contact_person: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

impl ClientInput {
    fn validate(&self) -> Result<(), ClientError> {
        if self.contact_person.trim().is_empty() {
            return Err(ClientError::MissingContactPerson);
        }
        Ok(())
    }
}

impl From<clients::Model> for Client {
    fn from(model: clients::Model) -> Self {
        Self {
            id: model.id,
            contact_person: model.contact_person.unwrap_or_default(),
            email: model.email,
            phone: model.phone,
            address: model.address,
        }
    }
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all clients ordered by contact person.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Client>, DbErr> {
        let rows = clients::Entity::find()
            .order_by_asc(clients::Column::ContactPerson)
            .order_by_asc(clients::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Finds a client by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Client>, DbErr> {
        Ok(clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Client::from))
    }

    /// Creates a client and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub async fn create(&self, input: ClientInput) -> Result<i32, ClientError> {
        input.validate()?;

        let client = clients::ActiveModel {
            id: NotSet,
            contact_person: Set(Some(input.contact_person)),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
        };
        let inserted = client.insert(&self.db).await?;

        tracing::info!(client_id = inserted.id, "Client created");
        Ok(inserted.id)
    }

    /// Replaces a client's details.
    ///
    /// # Errors
    ///
    /// Returns an error if the client does not exist or the update fails.
    pub async fn update(&self, id: i32, input: ClientInput) -> Result<Client, ClientError> {
        input.validate()?;

        let existing = clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ClientError::NotFound(id))?;

        let mut active: clients::ActiveModel = existing.into();
        active.contact_person = Set(Some(input.contact_person));
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.address = Set(input.address);

        let updated = active.update(&self.db).await?;
        Ok(updated.into())
    }

    /// Deletes a client. Invoices that reference it are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the client does not exist or the delete fails.
    pub async fn delete(&self, id: i32) -> Result<(), ClientError> {
        let result = clients::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ClientError::NotFound(id));
        }
        tracing::info!(client_id = id, "Client deleted");
        Ok(())
    }
}
