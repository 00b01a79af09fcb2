mod helpers;
mod sale_flow_test;
