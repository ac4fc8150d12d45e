mod test_loopback_link;
