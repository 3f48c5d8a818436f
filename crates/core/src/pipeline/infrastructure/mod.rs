pub mod object_worker;
