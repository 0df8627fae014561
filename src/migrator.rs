use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_booking_tables::Migration),
            Box::new(m20240101_000003_create_invoices_table::Migration),
            Box::new(m20240101_000004_create_loyalty_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::TenantId).big_integer().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_tenant_id")
                        .table(Customers::Table)
                        .col(Customers::TenantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Services::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Services::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Services::TenantId).big_integer().not_null())
                        .col(ColumnDef::new(Services::Name).string().not_null())
                        .col(
                            ColumnDef::new(Services::Price)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Services::DurationMinutes).integer().null())
                        .col(
                            ColumnDef::new(Services::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_services_tenant_id")
                        .table(Services::Table)
                        .col(Services::TenantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MembershipPlans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MembershipPlans::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MembershipPlans::TenantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MembershipPlans::Name).string().not_null())
                        .col(
                            ColumnDef::new(MembershipPlans::Price)
                                .decimal()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MembershipPlans::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Services::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        TenantId,
        Name,
        Phone,
        Email,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Services {
        Table,
        Id,
        TenantId,
        Name,
        Price,
        DurationMinutes,
        IsActive,
    }

    #[derive(DeriveIden)]
    pub(super) enum MembershipPlans {
        Table,
        Id,
        TenantId,
        Name,
        Price,
    }
}

mod m20240101_000002_create_booking_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_booking_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bookings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Bookings::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Bookings::TenantId).big_integer().not_null())
                        .col(ColumnDef::new(Bookings::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Bookings::StaffId).big_integer().null())
                        .col(ColumnDef::new(Bookings::BookingNumber).string().not_null())
                        .col(ColumnDef::new(Bookings::BookingDate).date().not_null())
                        .col(ColumnDef::new(Bookings::BookingTime).string().not_null())
                        .col(
                            ColumnDef::new(Bookings::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Bookings::Status).string().not_null())
                        .col(ColumnDef::new(Bookings::Notes).string().null())
                        .col(ColumnDef::new(Bookings::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bookings_customer")
                                .from(Bookings::Table, Bookings::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bookings_tenant_customer")
                        .table(Bookings::Table)
                        .col(Bookings::TenantId)
                        .col(Bookings::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BookingServices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BookingServices::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::TenantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::BookingId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::ServiceId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::Price)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_booking_services_booking")
                                .from(BookingServices::Table, BookingServices::BookingId)
                                .to(Bookings::Table, Bookings::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomerMemberships::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerMemberships::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::TenantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::PlanId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::StartDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::EndDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerMemberships::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomerMemberships::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BookingServices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Bookings::Table).to_owned())
                .await
        }
    }

    use super::m20240101_000001_create_catalog_tables::Customers;

    #[derive(DeriveIden)]
    pub(super) enum Bookings {
        Table,
        Id,
        TenantId,
        CustomerId,
        StaffId,
        BookingNumber,
        BookingDate,
        BookingTime,
        TotalAmount,
        Status,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum BookingServices {
        Table,
        Id,
        TenantId,
        BookingId,
        ServiceId,
        Quantity,
        Price,
    }

    #[derive(DeriveIden)]
    enum CustomerMemberships {
        Table,
        Id,
        TenantId,
        CustomerId,
        PlanId,
        StartDate,
        EndDate,
        CreatedAt,
    }
}

mod m20240101_000003_create_invoices_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Invoices::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::TenantId).big_integer().not_null())
                        .col(ColumnDef::new(Invoices::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Invoices::BookingId).big_integer().null())
                        .col(
                            ColumnDef::new(Invoices::InvoiceNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Invoices::Amount).decimal().not_null())
                        .col(
                            ColumnDef::new(Invoices::Subtotal)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::GstAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Invoices::ServiceDetails).json().not_null())
                        .col(ColumnDef::new(Invoices::ProductDetails).json().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::Notes).string().null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_tenant_customer")
                        .table(Invoices::Table)
                        .col(Invoices::TenantId)
                        .col(Invoices::CustomerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Invoices {
        Table,
        Id,
        TenantId,
        CustomerId,
        BookingId,
        InvoiceNumber,
        Amount,
        Subtotal,
        DiscountAmount,
        GstAmount,
        PaymentMethod,
        ServiceDetails,
        ProductDetails,
        InvoiceDate,
        DueDate,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000004_create_loyalty_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_catalog_tables::Customers;
    use super::m20240101_000003_create_invoices_table::Invoices;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_loyalty_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LoyaltyTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LoyaltyTransactions::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::TenantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::InvoiceId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::Points)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::TransactionType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::ExpiresAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(LoyaltyTransactions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_loyalty_transactions_customer")
                                .from(LoyaltyTransactions::Table, LoyaltyTransactions::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_loyalty_transactions_invoice")
                                .from(LoyaltyTransactions::Table, LoyaltyTransactions::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_loyalty_transactions_tenant_customer")
                        .table(LoyaltyTransactions::Table)
                        .col(LoyaltyTransactions::TenantId)
                        .col(LoyaltyTransactions::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomerLoyalty::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerLoyalty::TenantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerLoyalty::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerLoyalty::Points)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CustomerLoyalty::Tier).string_len(16).not_null())
                        .col(
                            ColumnDef::new(CustomerLoyalty::LifetimeSpending)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CustomerLoyalty::TotalEarned)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CustomerLoyalty::TotalRedeemed)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CustomerLoyalty::LastActivity)
                                .timestamp()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(CustomerLoyalty::TenantId)
                                .col(CustomerLoyalty::CustomerId),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomerLoyalty::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(LoyaltyTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum LoyaltyTransactions {
        Table,
        Id,
        TenantId,
        CustomerId,
        InvoiceId,
        Points,
        Amount,
        TransactionType,
        Description,
        ExpiresAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomerLoyalty {
        Table,
        TenantId,
        CustomerId,
        Points,
        Tier,
        LifetimeSpending,
        TotalEarned,
        TotalRedeemed,
        LastActivity,
    }
}
