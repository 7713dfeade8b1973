pub mod authors;
pub mod books;
pub mod customers;
pub mod openapi;
pub mod orders;
pub mod references;
pub mod reports;

use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{settings::Settings, ModuleRegistry};

use authors::{models::Author, service::AuthorService, AuthorsModule};
use books::{models::Book, service::BookService, BooksModule};
use customers::{models::Customer, service::CustomerService, CustomersModule};
use orders::{
    models::Order, pricing::PricingEngine, service::OrderService, OrdersModule,
};
use references::ReferenceValidator;
use reports::{aggregator::ReportAggregator, archive::ReportArchive, ReportsModule};

/// The four entity stores, shared by every service that reads them.
#[derive(Clone)]
pub struct Stores {
    pub authors: Arc<dyn Repository<Author>>,
    pub books: Arc<dyn Repository<Book>>,
    pub customers: Arc<dyn Repository<Customer>>,
    pub orders: Arc<dyn Repository<Order>>,
}

/// Domain services wired over one set of stores.
#[derive(Clone)]
pub struct Services {
    pub authors: Arc<AuthorService>,
    pub books: Arc<BookService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
    pub reports: Arc<ReportAggregator>,
}

impl Services {
    pub fn new(stores: &Stores, settings: &Settings) -> Self {
        let references = ReferenceValidator::new(
            stores.authors.clone(),
            stores.customers.clone(),
            stores.books.clone(),
        );

        Self {
            authors: Arc::new(AuthorService::new(stores.authors.clone())),
            books: Arc::new(BookService::new(stores.books.clone(), references.clone())),
            customers: Arc::new(CustomerService::new(stores.customers.clone())),
            orders: Arc::new(OrderService::new(
                stores.orders.clone(),
                references,
                PricingEngine::new(stores.books.clone()),
            )),
            reports: Arc::new(ReportAggregator::new(
                stores.orders.clone(),
                stores.books.clone(),
                ReportArchive::new(&settings.reports.dir),
                &settings.reports,
            )),
        }
    }
}

/// Register all bookstore modules.
///
/// Reports come last so the scheduler is the first thing stopped on shutdown,
/// before the entity modules flush their stores.
pub fn register_all(registry: &mut ModuleRegistry, services: &Services, settings: &Settings) {
    registry.register(Arc::new(AuthorsModule::new(services.authors.clone())));
    registry.register(Arc::new(CustomersModule::new(services.customers.clone())));
    registry.register(Arc::new(BooksModule::new(services.books.clone())));
    registry.register(Arc::new(OrdersModule::new(services.orders.clone())));
    registry.register(Arc::new(ReportsModule::new(
        services.reports.clone(),
        settings.reports.interval(),
    )));
}
