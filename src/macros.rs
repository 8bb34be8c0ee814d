mod repository_macros;
