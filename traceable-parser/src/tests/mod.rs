mod test_interfaces;
