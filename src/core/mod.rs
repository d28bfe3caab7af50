/// Approve/reject decisions on pending requests
pub mod approval;
/// Budget caps for line items
pub mod budget;
/// Submission input and boundary-form normalization
pub mod input;
/// Paginated listing with filters and sorting
pub mod listing;
/// Purchase orders raised from approved requests
pub mod purchase_order;
/// Purchase request lifecycle: submit, edit, delete, restore
pub mod purchase_request;
/// Lookup tables and their seeding
pub mod reference;
/// Scoped reference code generation
pub mod reference_code;
/// Workflow status registry
pub mod status;
/// Applicant accounts and staff ids
pub mod user;
