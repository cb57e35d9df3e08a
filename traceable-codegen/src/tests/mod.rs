mod test_backends;
