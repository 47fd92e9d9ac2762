fn main()
{
    repng_bin::main()
}
