mod translator_test;
