//! Company profile repository.
//!
//! The company is a single value: loading before anything was saved yields an
//! empty profile, and saving overwrites whatever is there.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

use invoicer_core::invoice::CompanyProfile;

use crate::entities::company::{self, COMPANY_ID};

impl From<company::Model> for CompanyProfile {
    fn from(model: company::Model) -> Self {
        Self {
            name: model.name.unwrap_or_default(),
            address: model.address.unwrap_or_default(),
            email: model.email.unwrap_or_default(),
            phone: model.phone.unwrap_or_default(),
            bank_info_1: model.bank_info_1.unwrap_or_default(),
            bank_info_2: model.bank_info_2.unwrap_or_default(),
        }
    }
}

/// Company profile repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the profile, or an empty one if none was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load(&self) -> Result<CompanyProfile, DbErr> {
        let model = company::Entity::find_by_id(COMPANY_ID).one(&self.db).await?;
        Ok(model.map(CompanyProfile::from).unwrap_or_default())
    }

    /// Inserts or overwrites the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn save(&self, profile: &CompanyProfile) -> Result<(), DbErr> {
        let row = company::ActiveModel {
            id: Set(COMPANY_ID),
            name: Set(Some(profile.name.clone())),
            address: Set(Some(profile.address.clone())),
            email: Set(Some(profile.email.clone())),
            phone: Set(Some(profile.phone.clone())),
            bank_info_1: Set(Some(profile.bank_info_1.clone())),
            bank_info_2: Set(Some(profile.bank_info_2.clone())),
        };

        company::Entity::insert(row)
            .on_conflict(
                OnConflict::column(company::Column::Id)
                    .update_columns([
                        company::Column::Name,
                        company::Column::Address,
                        company::Column::Email,
                        company::Column::Phone,
                        company::Column::BankInfo1,
                        company::Column::BankInfo2,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        tracing::debug!(name = %profile.name, "Company profile saved");
        Ok(())
    }
}
