mod test_disconnect_mid_negotiation;
mod test_leave;
