pub mod pair_status_service;
