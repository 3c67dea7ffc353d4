mod instructions_test;
