mod test_three_way_mesh;
