pub mod bitstamp_limiter;
